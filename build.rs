fn main() {
    // Propagate the ESP-IDF link environment (sysroot, linker args) set up
    // by esp-idf-sys. Host targets build the library without it, so only
    // emit when actually cross-compiling for the chip.
    let target = std::env::var("TARGET").unwrap_or_default();
    if target.ends_with("-espidf") {
        embuild::espidf::sysenv::output();
    }
}
