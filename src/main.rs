fn main() {
    pkgsweep::run_cli();
}
