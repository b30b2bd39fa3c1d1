pub mod ping;
pub mod run;
pub mod session;
pub mod tools;
pub mod version;
