// Unit tests for loopback port probing and selection

use crate::ports::{allocate_ephemeral, is_available, owner::describe_port_owner, select_endpoint};

use std::net::{Ipv4Addr, TcpListener};

fn occupy_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind ephemeral");
    let port = listener.local_addr().expect("local addr").port();
    (listener, port)
}

/// **VALUE**: Verifies that a live listener makes its port unavailable.
///
/// **WHY THIS MATTERS**: If the probe reports an occupied port as free, the
/// server's real bind fails and the whole application refuses to launch.
#[test]
fn given_bound_listener_when_probing_then_port_is_unavailable_until_released() {
    // GIVEN: A listener holding a loopback port
    let (listener, port) = occupy_port();

    // WHEN / THEN: The port is reported unavailable while held
    assert!(!is_available(port), "held port must be unavailable");

    // WHEN: The listener is released
    drop(listener);

    // THEN: The port becomes available again
    assert!(is_available(port), "released port must be available");
}

/// **VALUE**: Verifies that the ephemeral port is released before returning.
///
/// **BUG THIS CATCHES**: Would catch the probe listener leaking out of
/// `allocate_ephemeral`, which would make the server's own bind fail.
#[test]
fn given_ephemeral_allocation_when_returned_then_port_is_valid_and_free() {
    // WHEN: Allocating an ephemeral port
    let port = allocate_ephemeral().expect("ephemeral allocation");

    // THEN: It is a real port that can be bound immediately
    assert_ne!(port, 0);
    assert!(is_available(port));
}

#[test]
fn given_free_preferred_port_when_selecting_then_returns_it() {
    // GIVEN: A port known to be free
    let preferred = allocate_ephemeral().expect("ephemeral allocation");

    // WHEN: Selecting an endpoint
    let selected = select_endpoint(preferred).expect("selection");

    // THEN: The preferred port is kept
    assert_eq!(selected, preferred);
}

/// **VALUE**: Verifies the fallback when the preferred port is taken.
#[test]
fn given_occupied_preferred_port_when_selecting_then_returns_another_free_port() {
    // GIVEN: The preferred port held by a live listener
    let (_listener, preferred) = occupy_port();

    // WHEN: Selecting an endpoint
    let selected = select_endpoint(preferred).expect("selection");

    // THEN: A different, bindable port is returned
    assert_ne!(selected, preferred);
    assert!(is_available(selected));
}

/// **VALUE**: Verifies the owner lookup names this process for its own listener.
///
/// The socket table may be unreadable in restricted sandboxes, so only a
/// positive answer is checked.
#[test]
fn given_own_listener_when_describing_owner_then_reports_current_pid() {
    let (_listener, port) = occupy_port();

    if let Some(port_owner) = describe_port_owner(port) {
        assert_eq!(port_owner.pid, std::process::id());
        assert!(port_owner.to_string().contains(&port_owner.pid.to_string()));
    }
}
