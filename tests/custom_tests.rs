#[cfg(test)]
pub mod identity_tests {
    use std::sync::Arc;

    use sqlx::SqlitePool;

    use comment_board::auth::{CallbackParams, LoginProvider, demo_profile};
    use comment_board::error::{BusinessLogicErrorKind, DbResultSingle};
    use comment_board::models::{DEFAULT_AVATAR, Provider, UserResolveIdentity};
    use comment_board::repositories::{UserRepository, UserRepositoryResolveIdentity};
    use comment_board::session::Session;
    use comment_board::{DbPoolHandler, DbRepository, PoolHandler};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[sqlx::test(fixtures("users"))]
    async fn resolve_creates_then_refreshes(pool: SqlitePool) -> DbResultSingle<()> {
        init_logging();
        let arc_pool = Arc::new(pool);

        let mut repository = UserRepository::new(PoolHandler::new(arc_pool));

        let created = repository
            .resolve_identity(&UserResolveIdentity::new(
                Provider::Telegram,
                "demo_tg_user",
                "Telegram_User",
                None,
                Some("tg_user@example.com"),
            ))
            .await
            .expect("The repository call should succeed");

        assert_eq!(created.tg_id.as_deref(), Some("demo_tg_user"));
        assert_eq!(created.nickname, "Telegram_User");
        assert_eq!(created.avatar, DEFAULT_AVATAR);
        assert_eq!(created.email.as_deref(), Some("tg_user@example.com"));

        // a later login refreshes the profile but keeps the identity
        let refreshed = repository
            .resolve_identity(&UserResolveIdentity::new(
                Provider::Telegram,
                "demo_tg_user",
                "Telegram_Prime",
                Some("https://t.me/avatar.png"),
                None,
            ))
            .await
            .expect("The repository call should succeed");

        assert_eq!(refreshed.id, created.id);
        assert_eq!(refreshed.nickname, "Telegram_Prime");
        assert_eq!(refreshed.avatar, "https://t.me/avatar.png");
        // the provider sent no email this time, so the old one stays
        assert_eq!(refreshed.email.as_deref(), Some("tg_user@example.com"));

        repository.disconnect().await;
        Ok(())
    }

    #[sqlx::test(fixtures("users"))]
    async fn resolve_matches_existing_binding(pool: SqlitePool) -> DbResultSingle<()> {
        let arc_pool = Arc::new(pool);

        let mut repository = UserRepository::new(PoolHandler::new(arc_pool));

        // user 2 from the fixtures already carries the demo VK identity
        let resolved = repository
            .resolve_identity(&demo_profile(Provider::Vk).into_resolve())
            .await
            .expect("The repository call should succeed");

        assert_eq!(resolved.id, 2);
        assert_eq!(resolved.external_id(Provider::Vk), Some("demo_vk_user"));
        assert_eq!(resolved.external_id(Provider::Telegram), None);

        let again = repository
            .resolve_identity(&demo_profile(Provider::Vk).into_resolve())
            .await?;
        assert_eq!(again.id, 2);

        repository.disconnect().await;
        Ok(())
    }

    #[sqlx::test]
    async fn resolve_synthesizes_placeholder_email(pool: SqlitePool) -> DbResultSingle<()> {
        let arc_pool = Arc::new(pool);

        let mut repository = UserRepository::new(PoolHandler::new(arc_pool));

        let created = repository
            .resolve_identity(&UserResolveIdentity::new(
                Provider::Yandex,
                "777",
                "Mario",
                None,
                None,
            ))
            .await
            .expect("The repository call should succeed");

        assert_eq!(created.yandex_id.as_deref(), Some("777"));
        assert_eq!(created.email.as_deref(), Some("yandex_777@example.com"));

        repository.disconnect().await;
        Ok(())
    }

    #[sqlx::test(fixtures("users"))]
    async fn resolve_rejects_taken_email(pool: SqlitePool) -> DbResultSingle<()> {
        let arc_pool = Arc::new(pool);

        let mut repository = UserRepository::new(PoolHandler::new(arc_pool));

        // test@example.com already belongs to fixture user 1
        let conflict = repository
            .resolve_identity(&UserResolveIdentity::new(
                Provider::Telegram,
                "somebody_else",
                "Imposter",
                None,
                Some("test@example.com"),
            ))
            .await
            .expect_err("The repository call should return an error - the email is taken");

        assert!(conflict.is(BusinessLogicErrorKind::UserEmailAlreadyExists));

        repository.disconnect().await;
        Ok(())
    }

    #[sqlx::test(fixtures("users"))]
    async fn mock_login_resolves_and_binds_session(pool: SqlitePool) -> DbResultSingle<()> {
        let arc_pool = Arc::new(pool);

        let mut repository = UserRepository::new(PoolHandler::new(arc_pool));

        let provider = LoginProvider::Mock(Provider::Vk);
        assert_eq!(provider.provider(), Provider::Vk);

        let client = reqwest::Client::new();

        let user = provider
            .login(&client, &CallbackParams::default(), &mut repository)
            .await
            .expect("The mock login should succeed without a callback code");

        assert_eq!(user.id, 2);

        let mut session = Session::new();
        session.capture_redirect("/comments");
        session.bind(&user);

        assert_eq!(session.require_user(), Ok(2));
        assert_eq!(session.nickname(), Some("VK_User_Demo"));
        assert_eq!(session.consume_redirect().as_deref(), Some("/comments"));

        repository.disconnect().await;
        Ok(())
    }
}

#[cfg(test)]
pub mod user_repo_tests {
    use std::sync::Arc;

    use chrono::Utc;
    use sqlx::SqlitePool;

    use comment_board::error::DbResultSingle;
    use comment_board::models::{
        CommentCreate, CommentReadMany, DEFAULT_PAGE, UserCreate, UserDelete, UserGetById,
        UserUpdate,
    };
    use comment_board::repositories::{CommentRepository, UserRepository};
    use comment_board::{
        DbCreate, DbDelete, DbPoolHandler, DbReadMany, DbReadOne, DbRepository, DbUpdate,
        PoolHandler,
    };

    #[sqlx::test]
    async fn create_and_read(pool: SqlitePool) -> DbResultSingle<()> {
        let arc_pool = Arc::new(pool);

        // already applied by the test harness, a second run must be a no-op
        comment_board::run_migration(arc_pool.clone()).await?;

        let mut repository = UserRepository::new(PoolHandler::new(arc_pool));

        let user = repository
            .create(&UserCreate::new(
                "TestUser",
                "default-avatar.png",
                Some("test@example.com"),
            ))
            .await
            .expect("The repository call should succeed");

        let time = Utc::now();
        let time_difference_created = time - user.created_at;

        assert!(time_difference_created.num_seconds() < 2);
        assert_eq!(user.nickname, "TestUser");
        assert_eq!(user.avatar, "default-avatar.png");
        assert_eq!(user.email.as_deref(), Some("test@example.com"));
        assert_eq!(user.vk_id, None);

        let read_back = repository.read_one(&UserGetById::new(user.id)).await?;
        assert_eq!(read_back, user);

        repository.disconnect().await;
        Ok(())
    }

    #[sqlx::test(fixtures("users"))]
    async fn update(pool: SqlitePool) -> DbResultSingle<()> {
        let arc_pool = Arc::new(pool);

        let mut repository = UserRepository::new(PoolHandler::new(arc_pool));

        // correct
        let correct = repository
            .update(&UserUpdate::new(1, Some("Luigi"), None, None))
            .await
            .expect("The repository call should succeed");

        assert_eq!(correct.len(), 1);

        let correct = &correct[0];
        assert_eq!(correct.nickname, "Luigi");
        assert_eq!(correct.avatar, "default-avatar.png");
        assert_eq!(correct.email.as_deref(), Some("test@example.com"));

        // non correct arguments
        let incorrect_arguments = repository
            .update(&UserUpdate::new(1, None, None, None))
            .await
            .expect_err("The repository call should return an error - wrong update parameters (all fields are `None`)");

        assert_eq!(
            incorrect_arguments.to_string(),
            concat!(
                "[Database Error] Business logic error:",
                " The provided parameters for User update query are incorrect",
                " (no User field would be changed).",
            )
        );

        // non-existent
        let nonexistent = repository
            .update(&UserUpdate::new(999, Some("Waluigi"), None, None))
            .await
            .expect_err("The repository call should return an error - user never existed");

        assert_eq!(
            nonexistent.to_string(),
            "[Database Error] Business logic error: The specified user does not exist!"
        );

        repository.disconnect().await;
        Ok(())
    }

    #[sqlx::test(fixtures("users", "comments", "likes"))]
    async fn delete_cascades_through_owned_rows(pool: SqlitePool) -> DbResultSingle<()> {
        let arc_pool = Arc::new(pool);

        let mut users = UserRepository::new(PoolHandler::new(arc_pool.clone()));
        let mut comments = CommentRepository::new(PoolHandler::new(arc_pool));

        let deleted = users
            .delete(&UserDelete::new(1))
            .await
            .expect("The repository call should succeed");

        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].id, 1);

        // user 1 authored every top-level comment of the default page, so the
        // foreign key graph leaves the page empty (replies included)
        let listed = comments
            .read_many(&CommentReadMany::new(DEFAULT_PAGE, None, None, None))
            .await?;
        assert!(listed.is_empty());

        // rows of the other page belong to user 2 and survive
        let other_page = comments
            .read_many(&CommentReadMany::new("news", None, None, None))
            .await?;
        assert_eq!(other_page.len(), 1);

        // the page accepts new comments afterwards
        let fresh = comments
            .create(&CommentCreate::new(2, DEFAULT_PAGE, "Starting over", None))
            .await?;
        assert!(fresh.is_top_level());

        users.disconnect().await;
        Ok(())
    }
}

#[cfg(test)]
pub mod scenario_tests {
    use std::sync::Arc;

    use sqlx::SqlitePool;

    use comment_board::error::{BusinessLogicErrorKind, DbResultSingle};
    use comment_board::models::{
        CommentCreate, CommentDelete, CommentReadMany, DEFAULT_PAGE, LikeToggle, LikesByComment,
        RepliesByParent, UserGetById,
    };
    use comment_board::repositories::{
        CommentRepository, CommentRepositoryListReplies, LikeRepository, LikeRepositoryToggle,
        UserRepository,
    };
    use comment_board::session::Session;
    use comment_board::{
        DbCreate, DbDelete, DbPoolHandler, DbReadMany, DbReadOne, DbRepository, PoolHandler,
    };

    /// The board's intended walkthrough: post, reply, like, reject a reply
    /// like, then watch the cascade take everything down.
    #[sqlx::test(fixtures("users"))]
    async fn post_reply_like_delete(pool: SqlitePool) -> DbResultSingle<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let arc_pool = Arc::new(pool);

        let mut users = UserRepository::new(PoolHandler::new(arc_pool.clone()));
        let mut comments = CommentRepository::new(PoolHandler::new(arc_pool.clone()));
        let mut likes = LikeRepository::new(PoolHandler::new(arc_pool));

        // the session gate stands in for the web layer's login check
        let mut session = Session::new();
        assert!(session.require_user().is_err());

        let user = users.read_one(&UserGetById::new(1)).await?;
        session.bind(&user);
        let author = session.require_user().expect("The session should be bound");

        let a = comments
            .create(&CommentCreate::new(author, DEFAULT_PAGE, "A", None))
            .await?;
        let b = comments
            .create(&CommentCreate::new(2, DEFAULT_PAGE, "B", Some(a.id)))
            .await?;

        let liked = likes.toggle(&LikeToggle::new(a.id, author)).await?;
        assert!(liked.liked);
        assert_eq!(liked.likes_count, 1);

        let forbidden = likes
            .toggle(&LikeToggle::new(b.id, author))
            .await
            .expect_err("The repository call should return an error - B is a reply");
        assert!(forbidden.is(BusinessLogicErrorKind::LikesDisabledOnReplies));

        comments
            .delete(&CommentDelete::new(a.id, author, false))
            .await?;

        let listed = comments
            .read_many(&CommentReadMany::new(DEFAULT_PAGE, None, None, None))
            .await?;
        assert!(listed.is_empty());

        let replies = comments
            .list_replies(&RepliesByParent::new(a.id))
            .await
            .expect_err("The repository call should return an error - A is gone");
        assert!(replies.is(BusinessLogicErrorKind::CommentDoesNotExist));

        let count = likes
            .count_likes(&LikesByComment::new(a.id))
            .await
            .expect_err("The repository call should return an error - A is gone");
        assert!(count.is(BusinessLogicErrorKind::CommentDoesNotExist));

        users.disconnect().await;
        Ok(())
    }
}
