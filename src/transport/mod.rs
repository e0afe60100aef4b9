pub mod bt_pairing;
pub mod rfcomm;
pub mod tcp;
pub mod traits;

pub use bt_pairing::BondedPeers;
pub use rfcomm::{RfcommConnector, RfcommTarget};
pub use tcp::TcpConnector;
pub use traits::{TransportConnector, TransportStream};
