pub mod me;

pub use me::get as me_get;
