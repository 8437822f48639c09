/*!
Encoding of BGP4MP update archives.

The per-message encoders live next to their parsers (`encode` methods on the models); this
module assembles them into MRT records.
*/
mod updates_encoder;

pub use updates_encoder::MrtUpdatesEncoder;
