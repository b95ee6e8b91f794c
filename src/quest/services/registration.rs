//! Member enrolment and identity lookup.

use super::error::{GuildError, GuildResult};
use crate::quest::{
    domain::{ContactHandle, DisplayName, Fulfiller, GuildEvent, GuildEventKind, Requester},
    ports::{GuildStore, StoreError},
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for enrolling a member in either role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMemberRequest {
    display_name: String,
    platform: String,
    handle: String,
}

impl RegisterMemberRequest {
    /// Creates a registration request.
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        platform: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            platform: platform.into(),
            handle: handle.into(),
        }
    }
}

/// Registration status of a contact handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// Not registered in either role.
    Unregistered,
    /// Registered as a fulfiller.
    Fulfiller(Fulfiller),
    /// Registered as a requester.
    Requester(Requester),
}

/// Member registration service.
///
/// A contact handle can belong to one member only, across both roles.
#[derive(Clone)]
pub struct RegistrationService<S, C>
where
    S: GuildStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> RegistrationService<S, C>
where
    S: GuildStore,
    C: Clock + Send + Sync,
{
    /// Creates a new registration service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Registers an idle fulfiller.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Domain`] for blank fields and
    /// [`GuildError::AlreadyRegistered`] when the contact is taken.
    pub async fn register_fulfiller(
        &self,
        request: RegisterMemberRequest,
    ) -> GuildResult<Fulfiller> {
        let (display_name, contact) = self.validate(request).await?;
        let fulfiller = Fulfiller::register(display_name, contact.clone(), &*self.clock);
        self.store
            .insert_fulfiller(&fulfiller)
            .await
            .map_err(|err| already_registered(err, &contact))?;

        tracing::info!(fulfiller_id = %fulfiller.id(), %contact, "fulfiller registered");
        self.record(
            GuildEventKind::FulfillerRegistered,
            format!("fulfiller {} registered as {contact}", fulfiller.id()),
        )
        .await;
        Ok(fulfiller)
    }

    /// Registers a requester.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Domain`] for blank fields and
    /// [`GuildError::AlreadyRegistered`] when the contact is taken.
    pub async fn register_requester(
        &self,
        request: RegisterMemberRequest,
    ) -> GuildResult<Requester> {
        let (display_name, contact) = self.validate(request).await?;
        let requester = Requester::register(display_name, contact.clone(), &*self.clock);
        self.store
            .insert_requester(&requester)
            .await
            .map_err(|err| already_registered(err, &contact))?;

        tracing::info!(requester_id = %requester.id(), %contact, "requester registered");
        self.record(
            GuildEventKind::RequesterRegistered,
            format!("requester {} registered as {contact}", requester.id()),
        )
        .await;
        Ok(requester)
    }

    /// Finds the fulfiller registered under a contact handle.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Store`] when the lookup fails.
    pub async fn find_fulfiller_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> GuildResult<Option<Fulfiller>> {
        Ok(self.store.find_fulfiller_by_contact(contact).await?)
    }

    /// Finds the requester registered under a contact handle.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Store`] when the lookup fails.
    pub async fn find_requester_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> GuildResult<Option<Requester>> {
        Ok(self.store.find_requester_by_contact(contact).await?)
    }

    /// Resolves which role, if any, a contact handle is registered in.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Store`] when a lookup fails.
    pub async fn membership(&self, contact: &ContactHandle) -> GuildResult<Membership> {
        if let Some(fulfiller) = self.store.find_fulfiller_by_contact(contact).await? {
            return Ok(Membership::Fulfiller(fulfiller));
        }
        if let Some(requester) = self.store.find_requester_by_contact(contact).await? {
            return Ok(Membership::Requester(requester));
        }
        Ok(Membership::Unregistered)
    }

    /// Returns whether the contact handle is registered in either role.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Store`] when a lookup fails.
    pub async fn is_registered(&self, contact: &ContactHandle) -> GuildResult<bool> {
        Ok(self.membership(contact).await? != Membership::Unregistered)
    }

    async fn validate(
        &self,
        request: RegisterMemberRequest,
    ) -> GuildResult<(DisplayName, ContactHandle)> {
        let display_name = DisplayName::new(request.display_name)?;
        let contact = ContactHandle::new(request.platform, request.handle)?;
        if self.is_registered(&contact).await? {
            tracing::debug!(%contact, "registration rejected, contact already registered");
            return Err(GuildError::AlreadyRegistered(contact));
        }
        Ok((display_name, contact))
    }

    async fn record(&self, kind: GuildEventKind, detail: String) {
        let event = GuildEvent::record(kind, detail, &*self.clock);
        if let Err(err) = self.store.append_event(&event).await {
            tracing::warn!(event = %kind, error = %err, "failed to append guild event");
        }
    }
}

fn already_registered(err: StoreError, contact: &ContactHandle) -> GuildError {
    match err {
        StoreError::DuplicateContact(_) => GuildError::AlreadyRegistered(contact.clone()),
        other => GuildError::Store(other),
    }
}
