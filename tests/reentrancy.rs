//! Re-entrant calls during an active broadcast: nested updates run to
//! completion as a call stack, never a queue.

use statecell::Container;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn test_nested_update_completes_before_outer_broadcast_resumes() {
    let container = Container::new(0_i32);
    let order = Rc::new(RefCell::new(Vec::new()));

    {
        let container = container.clone();
        let order = Rc::clone(&order);
        container.clone().subscribe(move |n: &i32| {
            order.borrow_mut().push(("a", *n));
            if *n == 1 {
                // Re-enter from inside the broadcast.
                container.update(|m| m + 10);
            }
        });
    }
    {
        let order = Rc::clone(&order);
        container.subscribe(move |n: &i32| order.borrow_mut().push(("b", *n)));
    }
    order.borrow_mut().clear();

    container.update(|n| n + 1);

    // The nested update's full fan-out ("a" then "b" at 11) finishes before
    // the outer broadcast reaches "b" with its own pair.
    assert_eq!(
        *order.borrow(),
        vec![("a", 1), ("a", 11), ("b", 11), ("b", 1)]
    );
    assert_eq!(container.state(), 11);
    assert_eq!(container.previous(), 1);
}

#[test]
fn test_nested_update_observes_fully_applied_state() {
    let container = Container::new(1_i32);
    let observed_by_transform = Rc::new(Cell::new(0));

    {
        let container = container.clone();
        let observed = Rc::clone(&observed_by_transform);
        container.clone().subscribe(move |n: &i32| {
            if *n == 2 {
                container.update(|m| {
                    // The nested transform sees the outer update's result,
                    // never a half-applied value.
                    observed.set(*m);
                    m * 100
                });
            }
        });
    }

    container.update(|n| n + 1);

    assert_eq!(observed_by_transform.get(), 2);
    assert_eq!(container.state(), 200);
}

#[test]
fn test_outer_update_does_not_overwrite_nested_result() {
    let container = Container::new(0_u32);
    {
        let container = container.clone();
        container.clone().subscribe(move |n: &u32| {
            if *n == 1 {
                container.update(|m| m + 5);
            }
        });
    }

    container.update(|n| n + 1);
    container.update(|n| n + 1);

    // 0 -> 1 (nested: -> 6) -> 7; the outer writes never clobber the nested.
    assert_eq!(container.state(), 7);
}

#[test]
fn test_subscribe_during_broadcast_misses_inflight_change() {
    let container = Container::new(0_i32);
    let late_seen = Rc::new(RefCell::new(Vec::new()));

    {
        let container = container.clone();
        let late_seen = Rc::clone(&late_seen);
        let attached = Rc::new(Cell::new(false));
        container.clone().subscribe(move |n: &i32| {
            if *n == 1 && !attached.get() {
                attached.set(true);
                let late_seen = Rc::clone(&late_seen);
                container.subscribe(move |m: &i32| late_seen.borrow_mut().push(*m));
            }
        });
    }

    container.update(|n| n + 1);
    // The late subscriber got its immediate invocation but not the broadcast
    // that was already in flight.
    assert_eq!(*late_seen.borrow(), vec![1]);

    container.update(|n| n + 1);
    assert_eq!(*late_seen.borrow(), vec![1, 2]);
}

#[test]
fn test_unsubscribe_during_broadcast_skips_remaining_delivery() {
    let container = Container::new(0_i32);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let handle_slot: Rc<RefCell<Option<statecell::SubscriptionHandle>>> =
        Rc::new(RefCell::new(None));
    {
        let handle_slot = Rc::clone(&handle_slot);
        container.subscribe(move |n: &i32| {
            if *n == 1 {
                if let Some(handle) = handle_slot.borrow().as_ref() {
                    handle.unsubscribe();
                }
            }
        });
    }
    let handle = {
        let seen = Rc::clone(&seen);
        container.subscribe(move |n: &i32| seen.borrow_mut().push(*n))
    };
    *handle_slot.borrow_mut() = Some(handle);

    container.update(|n| n + 1);

    // Removed mid-broadcast by an earlier subscriber: only the immediate
    // invocation was ever delivered.
    assert_eq!(*seen.borrow(), vec![0]);
    assert_eq!(container.subscription_count(), 1);
}
