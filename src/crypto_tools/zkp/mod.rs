pub mod chaum_pedersen;
pub mod schnorr;
