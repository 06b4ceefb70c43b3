mod error;
pub mod ipv4;
pub mod order;

pub use error::CidrError;
pub use ipv4::{binary_representation, find_overlaps, overlaps, read_cidrs, Cidr};
pub use order::{compare_by_binary, sort_by_binary, HasCidr, SortKey};
