use storefront::{Order, Ordered, assign_order};

#[derive(storefront::Ordered)]
#[ordered(unique_for = "album")]
struct Track {
    album: String,
    order: Option<Order>,
}

#[derive(storefront::Ordered)]
#[ordered(unique_for = "shelf", field = "position")]
struct Book {
    shelf: u32,
    position: Option<Order>,
}

#[test]
fn derived_parent_and_order() {
    let track = Track {
        album: "Blue".to_string(),
        order: None,
    };
    assert_eq!(Track::UNIQUE_FOR_FIELD, "album");
    assert_eq!(track.parent_key(), "Blue");
    assert_eq!(Ordered::order(&track), None);
}

#[test]
fn assign_fills_missing_order() {
    let mut track = Track {
        album: "Blue".to_string(),
        order: None,
    };
    assert_eq!(assign_order(&mut track, [3, 1]), 4);
    assert_eq!(track.order, Some(4));
}

#[test]
fn assign_keeps_explicit_order() {
    let mut track = Track {
        album: "Blue".to_string(),
        order: Some(2),
    };
    assert_eq!(assign_order(&mut track, [2, 5]), 2);
    assert_eq!(track.order, Some(2));
}

#[test]
fn custom_order_field() {
    let mut book = Book {
        shelf: 7,
        position: None,
    };
    assert_eq!(Book::UNIQUE_FOR_FIELD, "shelf");
    assert_eq!(*book.parent_key(), 7);
    assert_eq!(assign_order(&mut book, []), 1);
    assert_eq!(book.position, Some(1));
}
