pub mod grade;
pub mod identify;
pub mod init;
pub mod parse_key;
