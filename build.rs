fn main() {
    // Embedded by `sqlx::migrate!`, so changes must trigger a rebuild.
    println!("cargo:rerun-if-changed=migrations");
}
