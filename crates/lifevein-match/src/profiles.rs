//! Private profiles and their published donor cards.
//!
//! Saving a profile is a fan-out: the full profile lands on the private
//! per-account path, and a reduced donor card is published so other
//! accounts can find the owner in donor search.

use lifevein_core::{UserProfile, normalize};
use lifevein_gateway::{Endpoint, Session};

use crate::{MatchEngine, Result, paths};

impl<E: Endpoint> MatchEngine<E> {
  /// Persist the session's profile and republish its donor card.
  pub async fn save_profile(&self, session: &Session, profile: &UserProfile) -> Result<()> {
    self
      .gateway
      .write(
        &paths::profile(&session.account_id),
        &normalize::profile_to_value(profile),
      )
      .await?;
    self
      .gateway
      .write(
        &paths::donor_card(&session.account_id),
        &normalize::donor_card_from_profile(profile),
      )
      .await?;

    tracing::debug!(account_id = %session.account_id, "profile saved");
    Ok(())
  }

  /// The session's own profile, if one has been saved.
  pub async fn load_profile(&self, session: &Session) -> Result<Option<UserProfile>> {
    let value = self.gateway.read(&paths::profile(&session.account_id)).await?;
    Ok(value.as_ref().and_then(normalize::profile_from_value))
  }
}
