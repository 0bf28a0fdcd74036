use clap::{Arg, ArgAction, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_VISIT: &str = "visit";
pub const CMD_ROUTES: &str = "routes";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_NAME: &str = "name";
pub const ARG_ADMIN: &str = "admin";
pub const ARG_PATH: &str = "path";

fn email() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email")
        .env("ISLANDLOGGER_EMAIL")
        .required(true)
}

fn password() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("ISLANDLOGGER_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Log in and store the session token")
                .arg(email())
                .arg(password())
                .arg(
                    Arg::new(ARG_ADMIN)
                        .long(ARG_ADMIN)
                        .help("Log in to the back-office; refused for non-admin accounts")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new(CMD_REGISTER)
                .about("Create an account and log into it")
                .arg(email())
                .arg(password())
                .arg(
                    Arg::new(ARG_NAME)
                        .short('n')
                        .long(ARG_NAME)
                        .help("Display name")
                        .required(true),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Forget the stored session"))
        .subcommand(Command::new(CMD_WHOAMI).about("Verify the stored session and show the user"))
        .subcommand(
            Command::new(CMD_VISIT)
                .about("Run the route guard for a path and print the outcome")
                .arg(
                    Arg::new(ARG_PATH)
                        .help("Route path, example: /admin/islands")
                        .required(true),
                ),
        )
        .subcommand(Command::new(CMD_ROUTES).about("List routes and their access requirements"))
}
