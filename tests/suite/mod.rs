mod codec;
mod derivation;
mod determinism;
