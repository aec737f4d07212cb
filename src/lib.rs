pub mod connection;
pub mod deps;
pub mod inventory;
pub mod jobs;
pub mod paths;
pub mod prompt;
pub mod services;
pub mod state;
pub mod vars;
pub mod volumes;

use anyhow::Result;

use crate::prompt::Prompter;

/// Drive the whole bootstrap, strictly in order: dependencies, connection,
/// inventory, volumes, service selection, job staging, generated vars, and
/// finally the persisted profile for the next run.
pub fn run() -> Result<()> {
    let paths = paths::Paths::discover()?;
    println!("==> NAS bootstrap starting");

    let state = state::SetupState::load(&paths.state_file)?;

    let mut installer = deps::Installer::new();
    installer.ensure_dependencies()?;

    let mut prompter = Prompter::new(std::io::stdin().lock());

    let connection = connection::configure(&mut prompter, &state)?;
    if prompter.confirm("Upload this SSH key to the remote host now?", true)? {
        connection::push_public_key(&connection)?;
    }

    inventory::write_inventory(&paths.inventory, &connection)?;

    let volumes =
        volumes::configure_volumes(&mut prompter, state.prior_volumes(), &paths.volume_defaults)?;
    let services =
        services::choose_services(&mut prompter, &paths.jobs_source, state.prior_services())?;

    jobs::stage_jobs(&paths.jobs_source, &paths.jobs_staging, &services)?;
    vars::write_generated_vars(&paths.generated_vars, &volumes, &services)?;

    state::SetupState::from_run(&connection, volumes, services).save(&paths.state_file)?;

    println!();
    println!("All set! You can now run `ansible-playbook -i ansible/inventory/hosts ansible/site.yml`.");
    Ok(())
}
