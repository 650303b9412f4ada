//! CSV table reading.

mod reader;

pub use reader::{
    CsvHeaders, MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, read_csv_schema,
    read_csv_table, read_csv_table_with_text_columns, validate_encoding,
};
