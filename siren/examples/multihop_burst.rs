use siren::simulations::multihop_burst;

fn main() {
    multihop_burst()
}
