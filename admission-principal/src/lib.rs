//! The access level lattice, endpoint characteristics, and the evaluator
//! that combines them into a caller's effective access level.
//!
//! This plays the role `scratchstack-aws-principal` plays for the
//! scratchstack workspace, minus anything ARN/IAM-specific: it is the
//! vocabulary the rest of the gateway uses to talk about how privileged a
//! caller is and how privileged a given endpoint needs them to be.

use std::collections::HashSet;

/// The privilege lattice, ordered from most to least privileged.
///
/// Declaration order *is* the ordering: `Admin` is declared first and so
/// has the lowest discriminant, which is what makes `effective <= required`
/// read as "at least as privileged as required" under the derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
    Admin,
    Moderator,
    Manager,
    PrivilegedRequestor,
    ResourceOwner,
    AuthenticatedRequestor,
    PublicRequestor,
    NoAccess,
}

impl AccessLevel {
    /// `true` iff a caller at `self` satisfies a requirement of `required`.
    pub fn satisfies(self, required: AccessLevel) -> bool {
        self <= required
    }
}

/// A sensitivity label on an endpoint. Closed characteristics
/// (`Internal`/`Moderative`/`Institutional`/`Special`) gate on a caller
/// classification; open, data-bearing characteristics
/// (`Private/PublicOwnedData`, `PublicUnownedData`) gate on ownership and
/// authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    Internal,
    Moderative,
    Institutional,
    Special,
    PrivateOwnedData,
    PublicOwnedData,
    PublicUnownedData,
}

/// A non-empty set of characteristics declared on an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Characteristics(HashSet<Characteristic>);

impl Characteristics {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    pub fn with(mut self, c: Characteristic) -> Self {
        self.0.insert(c);
        self
    }

    pub fn contains(&self, c: Characteristic) -> bool {
        self.0.contains(&c)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` iff any owned/unowned data characteristic is present, in
    /// which case registration requires an ownership predicate.
    pub fn requires_ownership_predicate(&self) -> bool {
        self.0.contains(&Characteristic::PrivateOwnedData) || self.0.contains(&Characteristic::PublicOwnedData)
    }
}

impl FromIterator<Characteristic> for Characteristics {
    fn from_iter<I: IntoIterator<Item = Characteristic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The six overridable predicates that customize access level evaluation
/// for a given application. All default to `false`; an application
/// overrides only the ones it needs, favoring composition over the
/// inheritance chains the design notes warn against.
pub trait AccessLevelEvaluator<Ctx: ?Sized> {
    fn is_denied(&self, _ctx: &Ctx) -> bool {
        false
    }
    fn is_internal(&self, _ctx: &Ctx) -> bool {
        false
    }
    fn is_moderative(&self, _ctx: &Ctx) -> bool {
        false
    }
    fn is_institutional(&self, _ctx: &Ctx) -> bool {
        false
    }
    fn is_privileged(&self, _ctx: &Ctx) -> bool {
        false
    }
    fn is_authenticated(&self, _ctx: &Ctx) -> bool {
        false
    }
}

/// An evaluator where every predicate defaults to `false`. Useful as a
/// baseline for applications that only care about data-bearing
/// characteristics and ownership.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEvaluator;

impl<Ctx: ?Sized> AccessLevelEvaluator<Ctx> for DefaultEvaluator {}

/// Evaluates the caller's effective access level for one endpoint.
///
/// Closed characteristics (`Internal`/`Moderative`/`Institutional`/
/// `Special`) are checked first and return as soon as one matches. The
/// remaining, data-bearing characteristics are checked as a cascade:
/// ownership is resolved once, up front, whenever the endpoint declares
/// either owned-data characteristic, and a non-owner falls through to
/// whichever other data-bearing characteristic the endpoint also declares
/// instead of being denied outright. `owns_resource` is therefore called
/// at most once per evaluation, and only when a declared characteristic
/// actually needs it.
pub fn evaluate_access_level<Ctx: ?Sized>(
    characteristics: &Characteristics,
    evaluator: &dyn AccessLevelEvaluator<Ctx>,
    ctx: &Ctx,
    owns_resource: impl FnOnce() -> bool,
) -> AccessLevel {
    if evaluator.is_denied(ctx) {
        return AccessLevel::NoAccess;
    }
    if characteristics.contains(Characteristic::Internal) && evaluator.is_internal(ctx) {
        return AccessLevel::Admin;
    }
    if characteristics.contains(Characteristic::Moderative) && evaluator.is_moderative(ctx) {
        return AccessLevel::Moderator;
    }
    if characteristics.contains(Characteristic::Institutional) && evaluator.is_institutional(ctx) {
        return AccessLevel::Manager;
    }
    if characteristics.contains(Characteristic::Special) && evaluator.is_privileged(ctx) {
        return AccessLevel::PrivilegedRequestor;
    }

    let private_owned = characteristics.contains(Characteristic::PrivateOwnedData);
    let public_owned = characteristics.contains(Characteristic::PublicOwnedData);
    let public_unowned = characteristics.contains(Characteristic::PublicUnownedData);

    if private_owned || public_owned {
        if owns_resource() {
            return AccessLevel::ResourceOwner;
        }
        if public_owned {
            return if evaluator.is_authenticated(ctx) {
                AccessLevel::AuthenticatedRequestor
            } else {
                AccessLevel::PublicRequestor
            };
        }
        if public_unowned {
            return if evaluator.is_authenticated(ctx) {
                AccessLevel::AuthenticatedRequestor
            } else {
                AccessLevel::PublicRequestor
            };
        }
        return AccessLevel::NoAccess;
    }

    if public_unowned {
        return if evaluator.is_authenticated(ctx) {
            AccessLevel::AuthenticatedRequestor
        } else {
            AccessLevel::PublicRequestor
        };
    }

    AccessLevel::NoAccess
}

/// The dominant characteristic's minimum required access level, checked in
/// priority order so closed characteristics shadow open ones. `None` means
/// the endpoint has no recognized characteristic and must always be
/// denied.
pub fn required_access_level(characteristics: &Characteristics) -> Option<AccessLevel> {
    use Characteristic::*;

    const PRIORITY: &[(Characteristic, AccessLevel)] = &[
        (Internal, AccessLevel::Admin),
        (Moderative, AccessLevel::Moderator),
        (Institutional, AccessLevel::Manager),
        (Special, AccessLevel::PrivilegedRequestor),
        (PublicUnownedData, AccessLevel::PublicRequestor),
        (PublicOwnedData, AccessLevel::AuthenticatedRequestor),
        (PrivateOwnedData, AccessLevel::ResourceOwner),
    ];

    PRIORITY.iter().find(|(c, _)| characteristics.contains(*c)).map(|(_, level)| *level)
}

/// The authorization gate: `true` iff `effective` satisfies the dominant
/// characteristic's requirement. Endpoints with no characteristics are
/// always denied.
pub fn authorize(characteristics: &Characteristics, effective: AccessLevel) -> bool {
    match required_access_level(characteristics) {
        Some(required) => effective.satisfies(required),
        None => false,
    }
}
