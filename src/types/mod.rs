pub mod country;
pub mod upstream;
