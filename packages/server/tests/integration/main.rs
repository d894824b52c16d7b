mod common;
mod plants;
