use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_REGISTER: &str = "register";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_PASSWORD_CONFIRM: &str = "password2";
pub const ARG_USERNAME: &str = "username";
pub const ARG_FIRST_NAME: &str = "first-name";
pub const ARG_LAST_NAME: &str = "last-name";
pub const ARG_COMPANY: &str = "empresa";

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long("email")
        .help("Account email")
        .env("SAEP_EMAIL")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long("password")
        .help("Account password")
        .env("SAEP_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in and store the session locally")
                .arg(email_arg())
                .arg(password_arg()),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Forget the stored session"))
        .subcommand(Command::new(CMD_WHOAMI).about("Show the signed-in user"))
        .subcommand(
            Command::new(CMD_REGISTER)
                .about("Create a new account")
                .arg(
                    Arg::new(ARG_USERNAME)
                        .short('u')
                        .long("username")
                        .help("Login name")
                        .required(true),
                )
                .arg(email_arg())
                .arg(
                    Arg::new(ARG_FIRST_NAME)
                        .long("first-name")
                        .help("First name")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_LAST_NAME)
                        .long("last-name")
                        .help("Last name")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_COMPANY)
                        .long("empresa")
                        .help("Company name"),
                )
                .arg(password_arg())
                .arg(
                    Arg::new(ARG_PASSWORD_CONFIRM)
                        .long("password2")
                        .help("Password confirmation")
                        .env("SAEP_PASSWORD2")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
}
