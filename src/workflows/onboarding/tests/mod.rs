mod common;

mod validation;
