fn main() -> std::process::ExitCode {
    catalog_admin_lib::run()
}
