mod common;

mod auth {
    mod signup {
        use crate::common::*;
        use http::StatusCode;

        #[tokio::test]
        async fn creates_user_and_session_then_redirects_to_onboarding() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());

            let body = signup_form_body("Test@Example.com", "Password123", "Password123");
            let response = post_form(&app, "/signup", None, &body).await;

            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), Some("/onboarding"));
            let cookie = session_cookie_from(&response);

            let email: String = sqlx::query_scalar("SELECT email FROM users")
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(email, "test@example.com");

            let onboarding = get(&app, "/onboarding", Some(&cookie)).await;
            assert_eq!(onboarding.status(), StatusCode::OK);
            let json = body_json(onboarding).await;
            assert_eq!(json["user"]["email"], "test@example.com");
            assert!(json["active_organization_id"].is_null());
            assert_eq!(json["memberships"].as_array().unwrap().len(), 0);
        }

        #[tokio::test]
        async fn duplicate_email_returns_error() {
            let pool = test_pool().await;
            let app = test_router(pool);

            let body = signup_form_body("dup@example.com", "Password123", "Password123");
            let first = post_form(&app, "/signup", None, &body).await;
            assert_eq!(first.status(), StatusCode::SEE_OTHER);

            let second = post_form(&app, "/signup", None, &body).await;
            assert_eq!(second.status(), StatusCode::BAD_REQUEST);
            let json = body_json(second).await;
            assert!(
                json["error"].as_str().unwrap().contains("Unable to create account"),
                "Expected generic signup error, got: {}",
                json
            );
        }

        #[tokio::test]
        async fn weak_password_is_rejected() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());

            let body = signup_form_body("weak@example.com", "alllowercase", "alllowercase");
            let response = post_form(&app, "/signup", None, &body).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count, 0);
        }

        #[tokio::test]
        async fn mismatched_confirmation_is_rejected() {
            let pool = test_pool().await;
            let app = test_router(pool);

            let body = signup_form_body("mismatch@example.com", "Password123", "Password124");
            let response = post_form(&app, "/signup", None, &body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    mod login {
        use crate::common::*;
        use condodesk::app::domain::OrganizationRole;
        use http::StatusCode;

        #[tokio::test]
        async fn valid_credentials_redirect_to_app() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            create_user(&pool, "login@example.com").await;

            let response = post_form(&app, "/login", None, &login_form_body("login@example.com", PASSWORD)).await;

            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), Some("/app"));
            assert!(response.headers().get("set-cookie").is_some());
        }

        #[tokio::test]
        async fn next_is_followed_only_when_local() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            create_user(&pool, "resident@example.com").await;
            let body = login_form_body("resident@example.com", PASSWORD);

            let local = post_form(&app, "/login?next=%2Faccount", None, &body).await;
            assert_eq!(location(&local), Some("/account"));

            let offsite = post_form(&app, "/login?next=https%3A%2F%2Fevil.example%2F", None, &body).await;
            assert_eq!(location(&offsite), Some("/app"));

            let scheme_relative = post_form(&app, "/login?next=%2F%2Fevil.example", None, &body).await;
            assert_eq!(location(&scheme_relative), Some("/app"));
        }

        #[tokio::test]
        async fn invalid_credentials_return_error() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            create_user(&pool, "known@example.com").await;

            let unknown = post_form(&app, "/login", None, &login_form_body("nobody@example.com", PASSWORD)).await;
            assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

            let wrong = post_form(&app, "/login", None, &login_form_body("known@example.com", "Wrongpass1")).await;
            assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
            let json = body_json(wrong).await;
            assert_eq!(json["error"], "Invalid email or password");
        }

        #[tokio::test]
        async fn session_starts_on_earliest_membership() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            let user = create_user(&pool, "multi@example.com").await;
            let first = create_organization(&pool, &user, "Primeiro Condominio").await;

            let other_owner = create_user(&pool, "other@example.com").await;
            let second = create_organization(&pool, &other_owner, "Segundo Condominio").await;
            sqlx::query("UPDATE organization_members SET created_at = created_at - 100 WHERE organization_id = ?")
                .bind(first.as_str())
                .execute(&pool)
                .await
                .unwrap();
            add_member(&pool, &second, &user, OrganizationRole::Member).await;

            let cookie = login(&app, "multi@example.com").await;
            let json = body_json(get(&app, "/app", Some(&cookie)).await).await;
            assert_eq!(json["organization"]["id"], first.as_str());
            assert_eq!(json["role"], "owner");
        }

        #[tokio::test]
        async fn user_without_membership_lands_on_onboarding() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            create_user(&pool, "lonely@example.com").await;

            let cookie = login(&app, "lonely@example.com").await;
            let response = get(&app, "/app", Some(&cookie)).await;

            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), Some("/onboarding"));
        }
    }

    mod logout {
        use crate::common::*;
        use http::StatusCode;

        #[tokio::test]
        async fn logout_deletes_session_and_clears_cookie() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            let (_, _, cookie) = owner_session(&pool, &app, "bye@example.com", "Edificio Bye").await;

            let response = post_form(&app, "/logout", Some(&cookie), "").await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), Some("/"));
            let set_cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
            assert!(set_cookie.starts_with("session_id="));
            assert!(set_cookie.contains("Max-Age=0"));

            let count: i64 = sqlx::query_scalar("SELECT count(*) FROM sessions")
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count, 0);

            let after = get(&app, "/app", Some(&cookie)).await;
            assert_eq!(location(&after), Some("/login"));
        }

        #[tokio::test]
        async fn logout_without_cookie_still_redirects() {
            let pool = test_pool().await;
            let app = test_router(pool);

            let response = post_form(&app, "/logout", None, "").await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }
    }

    mod account {
        use crate::common::*;
        use http::StatusCode;

        #[tokio::test]
        async fn account_requires_authentication() {
            let pool = test_pool().await;
            let app = test_router(pool);

            let response = get(&app, "/account", None).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), Some("/login"));
        }

        #[tokio::test]
        async fn update_name_and_read_back() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            create_user(&pool, "me@example.com").await;
            let cookie = login(&app, "me@example.com").await;

            let response = post_form(&app, "/account", Some(&cookie), "name=Maria%20Silva").await;
            assert_eq!(response.status(), StatusCode::OK);

            let json = body_json(get(&app, "/account", Some(&cookie)).await).await;
            assert_eq!(json["profile"]["name"], "Maria Silva");
            assert_eq!(json["profile"]["verified"], true);
        }

        #[tokio::test]
        async fn change_password_with_wrong_current_is_rejected() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            create_user(&pool, "pw@example.com").await;
            let cookie = login(&app, "pw@example.com").await;

            let body = "current_password=Nope12345&new_password=Newpass123&confirm_password=Newpass123";
            let response = post_form(&app, "/account/change-password", Some(&cookie), body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn change_password_then_login_with_new_one() {
            let pool = test_pool().await;
            let app = test_router(pool.clone());
            create_user(&pool, "pw2@example.com").await;
            let cookie = login(&app, "pw2@example.com").await;

            let body = format!("current_password={PASSWORD}&new_password=Newpass123&confirm_password=Newpass123");
            let response = post_form(&app, "/account/change-password", Some(&cookie), &body).await;
            assert_eq!(response.status(), StatusCode::NO_CONTENT);

            let old = post_form(&app, "/login", None, &login_form_body("pw2@example.com", PASSWORD)).await;
            assert_eq!(old.status(), StatusCode::BAD_REQUEST);
            let new = post_form(&app, "/login", None, &login_form_body("pw2@example.com", "Newpass123")).await;
            assert_eq!(new.status(), StatusCode::SEE_OTHER);
        }
    }
}
