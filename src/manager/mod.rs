use clap::{Parser, Subcommand};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{info, instrument};

use crate::{models::profiles::NewProfile, util::game_types::ProfileRole, AppState};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add an entry to the badge catalog.
    CreateBadge {
        slug: String,
        name: String,
        description: String,
        #[clap(long, default_value = "")]
        icon_url: String,
        /// Rule parameters as JSON, e.g. '{"streak": 3}'
        #[clap(long)]
        metadata: Option<String>,
    },
    CreateProfile {
        username: String,
        #[clap(long, default_value = "")]
        display_name: String,
    },
    /// Set a profile's site-wide role (user or admin).
    SetRole {
        profile_id: i32,
        role: String,
    },
    DeleteMatch {
        id_to_delete: i32,
    },
}

//skip state because it has members that don't implement Debug
#[instrument(name = "cli_command", skip(state))]
pub async fn parse_command(command: &Command, state: AppState) -> anyhow::Result<()> {
    match command {
        Command::CreateBadge {
            slug,
            name,
            description,
            icon_url,
            metadata,
        } => {
            use crate::schema::badges;

            let metadata: serde_json::Value = match metadata {
                Some(metadata) => serde_json::from_str(metadata)?,
                None => serde_json::json!({}),
            };

            let mut conn = state.db.get().await?;
            diesel::insert_into(badges::table)
                .values((
                    badges::slug.eq(slug),
                    badges::name.eq(name),
                    badges::description.eq(description),
                    badges::icon_url.eq(icon_url),
                    badges::metadata.eq(metadata),
                ))
                .execute(&mut conn)
                .await?;

            info!("Badge {slug} created");
            Ok(())
        }
        Command::CreateProfile {
            username,
            display_name,
        } => {
            let mut conn = state.db.get().await?;

            let profile = NewProfile::new(username, display_name, "")
                .create_or_update(&mut conn)
                .await?;

            info!("Profile {} has ID {}", profile.username, profile.id);
            Ok(())
        }
        Command::SetRole { profile_id, role } => {
            use crate::schema::profiles;

            let new_role = match role.as_str() {
                "user" => ProfileRole::User,
                "admin" => ProfileRole::Admin,
                other => anyhow::bail!("Unknown role {other}"),
            };

            let mut conn = state.db.get().await?;
            diesel::update(profiles::table.find(profile_id))
                .set(profiles::role.eq(new_role))
                .execute(&mut conn)
                .await?;

            info!("Profile {profile_id} is now {role}");
            Ok(())
        }
        Command::DeleteMatch { id_to_delete } => {
            use crate::schema::matches::dsl::*;

            let mut conn = state.db.get().await?;

            let match_to_delete = matches
                .find(*id_to_delete)
                .first::<crate::models::matches::Match>(&mut conn)
                .await?;
            match_to_delete.delete(&mut conn).await
        }
    }
}
