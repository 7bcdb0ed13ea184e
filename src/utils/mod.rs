pub mod date_parse;
pub mod shift_cache;
