use aeronull as an;

#[test]
fn second_session_lock_fails_until_released() {
    let td = tempfile::tempdir().unwrap();
    let first = an::acquire_session_lock(td.path()).expect("first lock");
    assert_eq!(first.path(), td.path().join(".aeronull.lock").as_path());

    let err = an::acquire_session_lock(td.path()).expect_err("second lock unexpectedly succeeded");
    assert_eq!(err.kind(), std::io::ErrorKind::Other);
    assert!(
        err.to_string().contains("already running"),
        "unexpected error message: {err}"
    );

    drop(first);
    assert!(!td.path().join(".aeronull.lock").exists());
    let again = an::acquire_session_lock(td.path()).expect("lock after release");
    drop(again);
}

#[test]
fn lock_at_creates_missing_parent() {
    let td = tempfile::tempdir().unwrap();
    let p = td.path().join("nested").join("x.lock");
    let l = an::acquire_lock_at(&p).expect("lock");
    assert!(p.exists());
    drop(l);
    assert!(!p.exists());
}
