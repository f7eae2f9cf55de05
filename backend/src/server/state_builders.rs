//! Builders wiring provider clients into the domain services.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use bankdash::domain::ports::{DocumentStore, IdentityGateway, ListingInvalidator};
use bankdash::domain::{
    BankAccountQueryService, BankOnboardingService, OnboardingPorts, UserAccountService,
};
use bankdash::inbound::http::state::HttpState;
use bankdash::outbound::appwrite::AppwriteClient;
use bankdash::outbound::cache::InMemoryListingRevisions;
use bankdash::outbound::dwolla::DwollaClient;
use bankdash::outbound::plaid::PlaidClient;
use bankdash::outbound::processor_bridge::PlaidDwollaBridge;
use bankdash::settings::ValidatedSettings;

fn client_error(provider: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("failed to build {provider} client: {error}"))
}

/// Build the provider clients and services behind the HTTP state.
///
/// # Errors
/// Returns [`std::io::Error`] when a provider client cannot be constructed.
pub(crate) fn build_http_state(
    settings: ValidatedSettings,
) -> std::io::Result<web::Data<HttpState>> {
    let appwrite = Arc::new(
        AppwriteClient::new(settings.appwrite)
            .map_err(|err| client_error("appwrite", err))?,
    );
    let plaid = Arc::new(
        PlaidClient::new(settings.plaid).map_err(|err| client_error("plaid", err))?,
    );
    let dwolla = Arc::new(
        DwollaClient::new(settings.dwolla, Arc::new(DefaultClock))
            .map_err(|err| client_error("dwolla", err))?,
    );
    let processor = Arc::new(PlaidDwollaBridge::new(plaid.clone(), dwolla));
    let revisions: Arc<dyn ListingInvalidator> = Arc::new(InMemoryListingRevisions::new());
    let store: Arc<dyn DocumentStore> = appwrite.clone();
    let identity: Arc<dyn IdentityGateway> = appwrite;

    let accounts = UserAccountService::new(
        identity,
        processor.clone(),
        store.clone(),
        settings.collections.users,
    );
    let onboarding = BankOnboardingService::new(OnboardingPorts {
        broker: plaid,
        processor,
        store: store.clone(),
        invalidator: revisions.clone(),
        bank_accounts: settings.collections.bank_accounts.clone(),
    });
    let bank_accounts =
        BankAccountQueryService::new(store, revisions, settings.collections.bank_accounts);

    Ok(web::Data::new(HttpState::new(
        Arc::new(accounts),
        Arc::new(onboarding),
        Arc::new(bank_accounts),
    )))
}
