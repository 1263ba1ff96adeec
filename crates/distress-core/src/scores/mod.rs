pub mod probability;

#[cfg(feature = "piotroski")]
pub mod piotroski;

#[cfg(feature = "altman")]
pub mod altman;

#[cfg(feature = "ohlson")]
pub mod ohlson;

#[cfg(feature = "chs")]
pub mod chs;
