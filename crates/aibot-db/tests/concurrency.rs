//! Concurrent writers against one on-disk database.
//!
//! Checks that the check-then-commit loops stay correct when two tasks
//! race for the same unique slot.

mod common;

use aibot_core::{CancellationToken, NewAnswer, NewQuestion, RepositoryError};

use common::{file_db, new_user, seed_user};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn same_name_registers_once() {
    let db = file_db().await;
    let cancel = CancellationToken::new();

    let mut first = new_user("racer");
    first.email = Some("first@example.com".to_string());
    let mut second = new_user("racer");
    second.email = Some("second@example.com".to_string());

    let (a, b) = tokio::join!(
        db.repos.users.insert_user(&cancel, &first),
        db.repos.users.insert_user(&cancel, &second),
    );

    let results = [a, b];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one insert wins: {results:?}");
    assert!(
        results
            .iter()
            .any(|r| *r == Err(RepositoryError::NameHasExist("racer".to_string())))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn same_like_lands_once() {
    let db = file_db().await;
    let cancel = CancellationToken::new();
    let uid = seed_user(&db.repos, "fan").await;
    let qid = db
        .repos
        .questions
        .insert_question(
            &cancel,
            &NewQuestion {
                user_id: uid,
                title: "popular".to_string(),
                remarks: String::new(),
                tags: vec![],
            },
        )
        .await
        .unwrap();

    let likes = &db.repos.likes;
    let (a, b) = tokio::join!(
        likes.insert_like_for_question(&cancel, uid, qid),
        likes.insert_like_for_question(&cancel, uid, qid),
    );

    assert!(a.is_ok() ^ b.is_ok(), "one like wins: {a:?} {b:?}");
    assert_eq!(
        likes.select_likes_count_for_question(&cancel, qid).await,
        Ok(1)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn answer_races_question_delete() {
    let db = file_db().await;
    let cancel = CancellationToken::new();
    let uid = seed_user(&db.repos, "writer").await;
    let qid = db
        .repos
        .questions
        .insert_question(
            &cancel,
            &NewQuestion {
                user_id: uid,
                title: "short lived".to_string(),
                remarks: String::new(),
                tags: vec![],
            },
        )
        .await
        .unwrap();

    let answer = NewAnswer {
        user_id: uid,
        question_id: qid,
        content: "late".to_string(),
    };
    let (inserted, deleted) = tokio::join!(
        db.repos.answers.insert_answer(&cancel, &answer),
        db.repos.questions.delete_question_by_id(&cancel, qid),
    );
    deleted.unwrap();

    // Either the answer landed first and was cascaded away, or it saw the
    // question gone.
    match inserted {
        Ok(aid) => assert_eq!(
            db.repos.answers.select_answer_by_id(&cancel, aid).await,
            Ok(None)
        ),
        Err(e) => assert_eq!(e, RepositoryError::QuestionNotExist(qid)),
    }
}

#[tokio::test]
async fn cancelled_writer_leaves_no_trace() {
    let db = file_db().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert_eq!(
        db.repos.users.insert_user(&cancel, &new_user("ghost")).await,
        Err(RepositoryError::Cancelled)
    );

    let live = CancellationToken::new();
    assert_eq!(
        db.repos
            .users
            .select_user_by_name(&live, "ghost")
            .await
            .unwrap(),
        None
    );
}
