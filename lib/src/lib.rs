pub mod attr;
pub mod constants;
pub mod error;
pub mod packet;
pub mod trans;
pub mod transport;
pub mod util;
