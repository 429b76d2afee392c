pub mod excel_read;
pub mod excel_write;

pub use excel_read::read_table;
pub use excel_write::write_table;
