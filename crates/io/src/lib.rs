// Source decoding - byte buffers from the upload layer into engine tables

pub mod delim;
pub mod xlsx;
