mod common;

use common::*;
use condodesk::app::{db, domain::OrganizationRole};
use http::StatusCode;
use serde_json::json;

async fn create_fraction(app: &axum::Router, cookie: &str, name: &str) -> String {
    let response = send_json(app, "POST", "/app/fractions", cookie, json!({ "name": name })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn add_resident(app: &axum::Router, cookie: &str, fraction_id: &str, user_id: &str, role: &str) -> StatusCode {
    send_json(
        app,
        "POST",
        &format!("/app/fractions/{fraction_id}/members"),
        cookie,
        json!({ "user_id": user_id, "role": role }),
    )
    .await
    .status()
}

mod fractions {
    use super::*;

    #[tokio::test]
    async fn owner_creates_and_lists_fractions() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, _, cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Sol").await;

        create_fraction(&app, &cookie, "2B").await;
        create_fraction(&app, &cookie, "1A").await;

        let list = body_json(get(&app, "/app/fractions", Some(&cookie)).await).await;
        let names: Vec<&str> = list.as_array().unwrap().iter().map(|f| f["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["1A", "2B"]);

        let duplicate = send_json(&app, "POST", "/app/fractions", &cookie, json!({ "name": "1A" })).await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let blank = send_json(&app, "POST", "/app/fractions", &cookie, json!({ "name": "  " })).await;
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn member_cannot_create_fractions() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, org, _) = owner_session(&pool, &app, "owner@example.com", "Edificio Lua").await;
        let (_, cookie) = member_session(&pool, &app, &org, "member@example.com", OrganizationRole::Member).await;

        let response = send_json(&app, "POST", "/app/fractions", &cookie, json!({ "name": "3C" })).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn fraction_owner_admin_edits_only_their_fraction() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, org, owner_cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Mar").await;
        let (resident, cookie) =
            member_session(&pool, &app, &org, "resident@example.com", OrganizationRole::Member).await;
        let theirs = create_fraction(&app, &owner_cookie, "1A").await;
        let other = create_fraction(&app, &owner_cookie, "1B").await;
        assert_eq!(
            add_resident(&app, &owner_cookie, &theirs, &resident.as_str(), "fraction_owner_admin").await,
            StatusCode::CREATED
        );

        let own = send_json(
            &app,
            "PATCH",
            &format!("/app/fractions/{theirs}"),
            &cookie,
            json!({ "name": "1A", "description": "Renovated" }),
        )
        .await;
        assert_eq!(own.status(), StatusCode::OK);
        assert_eq!(body_json(own).await["description"], "Renovated");

        let foreign = send_json(&app, "PATCH", &format!("/app/fractions/{other}"), &cookie, json!({ "name": "X" })).await;
        assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

        // Fraction roles never unlock organization-level actions.
        let delete = send_empty(&app, "DELETE", &format!("/app/fractions/{theirs}"), &cookie).await;
        assert_eq!(delete.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn fraction_owner_admin_adds_only_plain_residents() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (owner, org, owner_cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Rio").await;
        let (resident, cookie) =
            member_session(&pool, &app, &org, "resident@example.com", OrganizationRole::Member).await;
        let (neighbour, _) = member_session(&pool, &app, &org, "neighbour@example.com", OrganizationRole::Member).await;
        let (co_owner, _) = member_session(&pool, &app, &org, "co-owner@example.com", OrganizationRole::Member).await;
        let fraction = create_fraction(&app, &owner_cookie, "2A").await;
        add_resident(&app, &owner_cookie, &fraction, &resident.as_str(), "fraction_owner_admin").await;
        add_resident(&app, &owner_cookie, &fraction, &co_owner.as_str(), "fraction_owner_admin").await;

        // A peer owner-admin cannot be demoted through the upsert.
        assert_eq!(
            add_resident(&app, &cookie, &fraction, &co_owner.as_str(), "fraction_member").await,
            StatusCode::FORBIDDEN
        );
        let role: String = sqlx::query_scalar("SELECT role FROM fraction_members WHERE fraction_id = ? AND user_id = ?")
            .bind(&fraction)
            .bind(co_owner.as_str())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(role, "fraction_owner_admin");
        let remove_peer = send_empty(
            &app,
            "DELETE",
            &format!("/app/fractions/{fraction}/members/{}", co_owner.as_str()),
            &cookie,
        )
        .await;
        assert_eq!(remove_peer.status(), StatusCode::FORBIDDEN);

        assert_eq!(
            add_resident(&app, &cookie, &fraction, &neighbour.as_str(), "fraction_owner_admin").await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            add_resident(&app, &cookie, &fraction, &neighbour.as_str(), "fraction_member").await,
            StatusCode::CREATED
        );

        // Removing the owner-admin is reserved for managers.
        let remove_owner_admin = send_empty(
            &app,
            "DELETE",
            &format!("/app/fractions/{fraction}/members/{}", resident.as_str()),
            &cookie,
        )
        .await;
        assert_eq!(remove_owner_admin.status(), StatusCode::FORBIDDEN);

        let remove_neighbour = send_empty(
            &app,
            "DELETE",
            &format!("/app/fractions/{fraction}/members/{}", neighbour.as_str()),
            &cookie,
        )
        .await;
        assert_eq!(remove_neighbour.status(), StatusCode::NO_CONTENT);

        // Owners are organization members too but not residents here.
        let not_resident = send_empty(
            &app,
            "DELETE",
            &format!("/app/fractions/{fraction}/members/{}", owner.as_str()),
            &owner_cookie,
        )
        .await;
        assert_eq!(not_resident.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn residents_must_belong_to_the_organization() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, _, cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Vento").await;
        let (stranger, _, _) = owner_session(&pool, &app, "stranger@example.com", "Outro Edificio").await;
        let fraction = create_fraction(&app, &cookie, "4D").await;

        assert_eq!(
            add_resident(&app, &cookie, &fraction, &stranger.as_str(), "fraction_member").await,
            StatusCode::NOT_FOUND
        );
    }
}

mod tickets {
    use super::*;

    #[tokio::test]
    async fn member_opens_ticket_but_cannot_change_status() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, org, owner_cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Flor").await;
        let (_, cookie) = member_session(&pool, &app, &org, "member@example.com", OrganizationRole::Member).await;

        let response = send_json(
            &app,
            "POST",
            "/app/tickets",
            &cookie,
            json!({ "title": "Elevator stuck", "priority": "urgent" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let ticket = body_json(response).await;
        assert_eq!(ticket["status"], "open");
        assert_eq!(ticket["priority"], "urgent");
        let id = ticket["id"].as_str().unwrap().to_string();

        let denied = send_json(
            &app,
            "PATCH",
            &format!("/app/tickets/{id}/status"),
            &cookie,
            json!({ "status": "resolved" }),
        )
        .await;
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let allowed = send_json(
            &app,
            "PATCH",
            &format!("/app/tickets/{id}/status"),
            &owner_cookie,
            json!({ "status": "in_progress" }),
        )
        .await;
        assert_eq!(allowed.status(), StatusCode::OK);

        let open = body_json(get(&app, "/app/tickets?status=in_progress", Some(&cookie)).await).await;
        assert_eq!(open.as_array().unwrap().len(), 1);
        let resolved = body_json(get(&app, "/app/tickets?status=resolved", Some(&cookie)).await).await;
        assert!(resolved.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ticket_cannot_reference_foreign_fraction() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, _, cookie_a) = owner_session(&pool, &app, "a@example.com", "Edificio A").await;
        let (_, _, cookie_b) = owner_session(&pool, &app, "b@example.com", "Edificio B").await;
        let foreign = create_fraction(&app, &cookie_b, "9Z").await;

        let response = send_json(
            &app,
            "POST",
            "/app/tickets",
            &cookie_a,
            json!({ "title": "Leak", "fraction_id": foreign }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM tickets")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}

mod suppliers_and_maintenance {
    use super::*;

    #[tokio::test]
    async fn admin_manages_suppliers_members_only_read() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, org, _) = owner_session(&pool, &app, "owner@example.com", "Edificio Pinho").await;
        let (_, admin) = member_session(&pool, &app, &org, "admin@example.com", OrganizationRole::Admin).await;
        let (_, member) = member_session(&pool, &app, &org, "member@example.com", OrganizationRole::Member).await;

        let body = json!({ "name": "Elevadores Lda", "category": "elevator", "email": "geral@elevadores.pt" });
        assert_eq!(
            send_json(&app, "POST", "/app/suppliers", &member, body.clone()).await.status(),
            StatusCode::FORBIDDEN
        );
        let created = send_json(&app, "POST", "/app/suppliers", &admin, body).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = body_json(get(&app, "/app/suppliers", Some(&member)).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let bad_email = send_json(
            &app,
            "POST",
            "/app/suppliers",
            &admin,
            json!({ "name": "Limpa Tudo", "category": "cleaning", "email": "not-an-email" }),
        )
        .await;
        assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn maintenance_records_validate_date_cost_and_supplier() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, _, cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Carvalho").await;
        let (_, _, foreign_cookie) = owner_session(&pool, &app, "other@example.com", "Edificio Outro").await;

        let supplier = body_json(
            send_json(&app, "POST", "/app/suppliers", &cookie, json!({ "name": "Canalizador", "category": "plumbing" }))
                .await,
        )
        .await;
        let supplier_id = supplier["id"].as_str().unwrap().to_string();

        let bad_date = send_json(
            &app,
            "POST",
            "/app/maintenance",
            &cookie,
            json!({ "title": "Pipes", "performed_on": "31/12/2026" }),
        )
        .await;
        assert_eq!(bad_date.status(), StatusCode::BAD_REQUEST);

        let negative = send_json(
            &app,
            "POST",
            "/app/maintenance",
            &cookie,
            json!({ "title": "Pipes", "performed_on": "2026-10-01", "cost_cents": -5 }),
        )
        .await;
        assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

        let foreign_supplier = send_json(
            &app,
            "POST",
            "/app/maintenance",
            &foreign_cookie,
            json!({ "title": "Pipes", "performed_on": "2026-10-01", "supplier_id": supplier_id }),
        )
        .await;
        assert_eq!(foreign_supplier.status(), StatusCode::NOT_FOUND);

        let created = send_json(
            &app,
            "POST",
            "/app/maintenance",
            &cookie,
            json!({ "title": "Pipes", "performed_on": "2026-10-01", "cost_cents": 12500, "supplier_id": supplier_id }),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let filtered = body_json(
            get(&app, &format!("/app/maintenance?supplier_id={supplier_id}"), Some(&cookie)).await,
        )
        .await;
        assert_eq!(filtered.as_array().unwrap().len(), 1);
    }
}

mod documents {
    use super::*;

    #[tokio::test]
    async fn documents_are_keyed_under_their_organization() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, org, cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Cedro").await;
        let (_, member) = member_session(&pool, &app, &org, "member@example.com", OrganizationRole::Member).await;

        let body = json!({ "title": "Ata 2026", "category": "minutes", "file_name": "../../ata 2026.pdf" });
        assert_eq!(
            send_json(&app, "POST", "/app/documents", &member, body.clone()).await.status(),
            StatusCode::FORBIDDEN
        );

        let created = send_json(&app, "POST", "/app/documents", &cookie, body).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let document = body_json(created).await;
        let key = document["storage_key"].as_str().unwrap();
        assert!(key.starts_with(&format!("organizations/{}/documents/", org.as_str())));
        assert!(key.ends_with("/ata_2026.pdf"));

        let minutes = body_json(get(&app, "/app/documents?category=minutes", Some(&member)).await).await;
        assert_eq!(minutes.as_array().unwrap().len(), 1);
        let budgets = body_json(get(&app, "/app/documents?category=budget", Some(&member)).await).await;
        assert!(budgets.as_array().unwrap().is_empty());
    }
}

mod site {
    use super::*;

    #[tokio::test]
    async fn health_reports_database() {
        let pool = test_pool().await;
        let app = test_router(pool);

        let response = get(&app, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], "ok");
    }
}

mod members {
    use super::*;

    #[tokio::test]
    async fn last_owner_cannot_step_down() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (owner, _, cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Unico").await;

        let response = send_json(
            &app,
            "PATCH",
            &format!("/app/members/{}", owner.as_str()),
            &cookie,
            json!({ "role": "admin" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let removal = send_empty(&app, "DELETE", &format!("/app/members/{}", owner.as_str()), &cookie).await;
        assert_eq!(removal.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn owners_demoting_each_other_leave_one_owner() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (first, org, first_cookie) = owner_session(&pool, &app, "first@example.com", "Edificio Duplo").await;
        let (second, second_cookie) =
            member_session(&pool, &app, &org, "second@example.com", OrganizationRole::Owner).await;

        let first_uri = format!("/app/members/{}", second.as_str());
        let second_uri = format!("/app/members/{}", first.as_str());
        let (a, b) = tokio::join!(
            send_json(&app, "PATCH", &first_uri, &first_cookie, json!({ "role": "admin" })),
            send_json(&app, "PATCH", &second_uri, &second_cookie, json!({ "role": "admin" })),
        );
        assert!(a.status() == StatusCode::OK || b.status() == StatusCode::OK);

        let owners: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM organization_members WHERE organization_id = ? AND role = 'owner'",
        )
        .bind(org.as_str())
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(owners, 1);
    }

    #[tokio::test]
    async fn demote_owner_refuses_the_last_one() {
        let pool = test_pool().await;
        let owner = create_user(&pool, "a@example.com").await;
        let org = create_organization(&pool, &owner, "Edificio Guarda").await;
        let other = create_user(&pool, "b@example.com").await;
        add_member(&pool, &org, &other, OrganizationRole::Owner).await;
        let scope = scope_for(&pool, &owner, &org).await;

        assert!(db::organizations::demote_owner(&scope, &pool, &other, OrganizationRole::Admin).await.unwrap());
        assert!(!db::organizations::demote_owner(&scope, &pool, &owner, OrganizationRole::Admin).await.unwrap());
        assert!(!db::organizations::remove_owner(&scope, &pool, &owner).await.unwrap());
        assert_eq!(
            db::organizations::find_member_role(&pool, &org, &owner).await.unwrap(),
            Some(OrganizationRole::Owner)
        );
    }

    #[tokio::test]
    async fn only_owners_grant_ownership() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        let (_, org, owner_cookie) = owner_session(&pool, &app, "owner@example.com", "Edificio Par").await;
        let (_, admin_cookie) = member_session(&pool, &app, &org, "admin@example.com", OrganizationRole::Admin).await;
        let (member, _) = member_session(&pool, &app, &org, "member@example.com", OrganizationRole::Member).await;
        let uri = format!("/app/members/{}", member.as_str());

        let denied = send_json(&app, "PATCH", &uri, &admin_cookie, json!({ "role": "owner" })).await;
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let promoted = send_json(&app, "PATCH", &uri, &owner_cookie, json!({ "role": "owner" })).await;
        assert_eq!(promoted.status(), StatusCode::OK);
        let members = body_json(promoted).await;
        let row = members
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["email"] == "member@example.com")
            .unwrap()
            .clone();
        assert_eq!(row["role"], "owner");
    }
}
