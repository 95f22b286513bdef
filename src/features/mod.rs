pub mod pets;
