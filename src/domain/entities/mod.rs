pub mod raw_table;
pub mod sales_record;
