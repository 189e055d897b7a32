mod common;
mod domain;
mod issuer;
