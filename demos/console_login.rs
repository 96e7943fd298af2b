//! Walks a console "login screen" through the facade against the in-memory provider: popup
//! sign-in, linking a password onto that account, signing out, then signing back in with the
//! password. Session changes drive the "navigation", as they would in a UI.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use auth_facade::{
	auth::Session,
	config::{FacadeConfig, Platform},
	facade::AuthFacade,
	outcome::AuthResult,
	provider::{MemoryIdentityProvider, memory::PopupOutcome},
};

fn report<T>(step: &str, result: &AuthResult<T>) {
	match result.failure() {
		None => println!("[{step}] {}", result.message()),
		Some(failure) if failure.is_cancelled() => println!("[{step}] cancelled"),
		Some(failure) => println!("[{step}] alert: {}", failure.user_message()),
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let provider = Arc::new(MemoryIdentityProvider::default());
	let config = FacadeConfig::builder().platform(Platform::Web).build()?;
	let facade: AuthFacade<MemoryIdentityProvider> = AuthFacade::new(provider.clone(), config);
	let _navigation = facade.observe_session_changes(|session: Option<&Session>| match session {
		Some(session) => println!(
			"-> home ({}, linked: {:?})",
			session.email.as_deref().unwrap_or("no email"),
			session.providers
		),
		None => println!("-> login"),
	});

	provider.script_popup(PopupOutcome::closed_by_user());
	report("google", &facade.sign_in_with_third_party().await);

	provider.script_popup(PopupOutcome::identity("ada@example.com"));
	report("google", &facade.sign_in_with_third_party().await);

	report("register", &facade.register_with_password("ada@example.com", "short").await);
	report("register", &facade.register_with_password("ada@example.com", "hunter22").await);
	report("sign out", &facade.sign_out().await);
	report("sign in", &facade.sign_in_with_password("ada@example.com", "wrong-pass").await);
	report("sign in", &facade.sign_in_with_password("ada@example.com", "hunter22").await);

	Ok(())
}
