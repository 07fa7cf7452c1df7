pub mod login;
pub mod logout;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login {
        email: String,
        password: SecretString,
    },
    Logout,
}
