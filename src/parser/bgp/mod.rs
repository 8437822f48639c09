/*!
Provides parsing of BGP messages carried inside MRT records.
*/
pub mod attributes;
pub mod messages;

pub use messages::parse_bgp_message;
