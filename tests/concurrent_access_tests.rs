/// Concurrent access tests
///
/// Shared mapper instances used from many tasks and threads
/// Run with: cargo test --test concurrent_access_tests


use entities::*;
use entitymapper::{MapperError, MapperExt, MapperHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_maps() {
    let handle = MapperHandle::default();
    handle.register(user_to_dto).unwrap();

    let mut handles = vec![];
    let num_tasks = 10;

    for task_id in 0..num_tasks {
        let mapper = handle.capability();

        let join = tokio::spawn(async move {
            for i in 0..50 {
                let dto: UserDto = mapper.map(user(task_id * 100 + i, "concurrent")).unwrap();
                assert_eq!(dto.id, task_id * 100 + i, "Task {} got a wrong id", task_id);
            }
        });

        handles.push(join);
    }

    for join in handles {
        join.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_shot_is_consumed_exactly_once() {
    let handle = MapperHandle::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    handle
        .register_once(move |user: User| {
            counter.fetch_add(1, Ordering::SeqCst);
            user_to_dto(user)
        })
        .unwrap();

    let num_tasks = 16;
    let barrier = Arc::new(Barrier::new(num_tasks));
    let mut handles = vec![];

    for task_id in 0..num_tasks {
        let mapper = handle.capability();
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            mapper.map::<User, UserDto>(user(task_id as i32, "race"))
        }));
    }

    let mut successes = 0;
    let mut missing = 0;
    for join in handles {
        match join.await.unwrap() {
            Ok(_) => successes += 1,
            Err(MapperError::MissingConfiguration(..)) => missing += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(missing, num_tasks - 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_one_shot_is_consumed_exactly_once() {
    let handle = MapperHandle::default();
    handle
        .register_async_once(|user: User| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            user_to_dto(user)
        })
        .unwrap();

    let num_tasks = 8;
    let barrier = Arc::new(Barrier::new(num_tasks));
    let mut handles = vec![];

    for task_id in 0..num_tasks {
        let mapper = handle.capability();
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            mapper
                .map_async::<User, UserDto>(user(task_id as i32, "race"))
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for join in handles {
        if join.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
}

#[test]
fn test_register_and_map_from_threads() {
    let handle = MapperHandle::default();
    let mut threads = vec![];

    let registrar = handle.concrete();
    threads.push(std::thread::spawn(move || {
        registrar.register(strange_to_dto).unwrap();
    }));

    for _ in 0..4 {
        let mapper = handle.capability();
        threads.push(std::thread::spawn(move || {
            for _ in 0..100 {
                match mapper.map::<UserStrange, UserDtoStrange>(strange_user()) {
                    Ok(dto) => assert_eq!(dto.full_name, "Nikita Okhotnikov"),
                    Err(err) => assert!(matches!(err, MapperError::MissingConfiguration(..))),
                }
            }
        }));
    }

    for thread in threads {
        thread.join().unwrap();
    }

    let dto: UserDtoStrange = handle.map(strange_user()).unwrap();
    assert_eq!(dto.id, 25);
}
