pub mod key_table;
