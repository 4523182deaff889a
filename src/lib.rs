pub mod errors;
pub mod matching;
pub mod session;
pub mod table;
pub mod utils;
