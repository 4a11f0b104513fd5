use std::env;
extern crate memlru;

fn main() {
    let args: Vec<String> = env::args().collect();
    memlru::server::main::run(args);
}
