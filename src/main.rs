use clap::Parser;

#[derive(Parser)]
#[command(name = "nas-bootstrap")]
#[command(version)]
#[command(
    about = "Bootstrap a NAS/Nomad homelab: prerequisites, SSH access, inventory, and job staging",
    long_about = None
)]
struct Cli {}

// Interrupting a prompt must abort the whole run with a one-line message.
// Only async-signal-safe calls are allowed here.
extern "C" fn handle_interrupt(_: libc::c_int) {
    const MSG: &[u8] = b"\nAborted.\n";
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            MSG.as_ptr() as *const libc::c_void,
            MSG.len(),
        );
        libc::_exit(1);
    }
}

fn main() {
    let _cli = Cli::parse();

    let handler = handle_interrupt as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }

    nas_bootstrap::deps::preflight();

    if let Err(e) = nas_bootstrap::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
