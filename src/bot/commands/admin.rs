//! Administration Discord commands - categories and profiles.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, author_profile, commands::format},
        core::{
            category,
            profile::{self, ProfileUpdate, Role},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Role choices offered by `/set_role`.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum RoleChoice {
        #[name = "Employee"]
        Employee,
        #[name = "Admin"]
        Admin,
        #[name = "Super Admin"]
        SuperAdmin,
    }

    impl From<RoleChoice> for Role {
        fn from(choice: RoleChoice) -> Self {
            match choice {
                RoleChoice::Employee => Self::Employee,
                RoleChoice::Admin => Self::Admin,
                RoleChoice::SuperAdmin => Self::SuperAdmin,
            }
        }
    }

    /// Lists all expense categories.
    #[poise::command(slash_command, prefix_command)]
    pub async fn categories(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let categories = category::list_categories(&ctx.data().database).await?;

        if categories.is_empty() {
            ctx.say("📂 No categories yet. An admin can add one with `/add_category`.")
                .await?;
            return Ok(());
        }

        ctx.say(format::category_list(&categories)?).await?;
        Ok(())
    }

    /// Adds an expense category (admins only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn add_category(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category name"]
        #[max_length = 40]
        name: String,
        #[description = "Track mileage and trip locations? (default: false)"]
        requires_mileage: Option<bool>,
    ) -> Result<()> {
        let author = author_profile(ctx).await?;
        let created = category::create_category(
            &ctx.data().database,
            &author.id,
            &name,
            requires_mileage.unwrap_or(false),
        )
        .await?;

        ctx.say(format!("✅ Created category **{}**.", created.name))
            .await?;
        Ok(())
    }

    /// Lists all profiles and their roles (admins only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn profiles(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let author = author_profile(ctx).await?;
        profile::require_privileged(db, &author.id, "view profiles").await?;

        let profiles = profile::list_profiles(db).await?;
        ctx.say(format::profile_list(&profiles)?).await?;
        Ok(())
    }

    /// Updates your own name or email. Super admins may update anyone's.
    #[poise::command(slash_command, prefix_command)]
    pub async fn edit_profile(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First name"]
        #[max_length = 40]
        first_name: Option<String>,
        #[description = "Last name"]
        #[max_length = 40]
        last_name: Option<String>,
        #[description = "Email"]
        #[max_length = 100]
        email: Option<String>,
        #[description = "Profile to edit (super admins only)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let author = author_profile(ctx).await?;
        let target_id = user.map_or_else(|| author.id.clone(), |u| u.id.to_string());

        let changes = ProfileUpdate {
            first_name,
            last_name,
            email,
            role: None,
        };
        let updated =
            profile::update_profile(&ctx.data().database, &author.id, &target_id, changes).await?;

        ctx.say(format!(
            "✅ Updated profile of **{}**.",
            profile::display_name(&updated)
        ))
        .await?;
        Ok(())
    }

    /// Changes a user's role (super admins only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn set_role(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User whose role to change"] user: serenity::User,
        #[description = "New role"] role: RoleChoice,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let author = author_profile(ctx).await?;
        if profile::role_of(&author) != Role::SuperAdmin {
            return Err(Error::unauthorized("change roles"));
        }
        let target_id = user.id.to_string();
        let first_name = user.global_name.as_deref().unwrap_or(&user.name);
        profile::ensure_profile(db, &target_id, first_name).await?;

        let changes = ProfileUpdate {
            role: Some(role.into()),
            ..ProfileUpdate::default()
        };
        let updated = profile::update_profile(db, &author.id, &target_id, changes).await?;

        ctx.say(format!(
            "✅ <@{}> is now **{}**.",
            updated.id,
            profile::role_of(&updated)
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
