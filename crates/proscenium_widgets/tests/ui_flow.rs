//! Cross-widget integration: input entry points through layout to draw
//! commands, the way a host drives a frame.

use proscenium_scene::{ActorId, Batch, MouseButton, RenderCommand, Stage, Vec2};
use proscenium_widgets::{
    Button, ButtonStyle, Container, ScrollPane, ScrollPaneStyle, ScrollTuning, Tree, TreeStyle,
    Value,
};

fn to_screen(p: Vec2) -> Vec2 {
    Vec2::new(p.x, 400.0 - p.y)
}

fn row_actor(stage: &mut Stage, w: f32, h: f32) -> ActorId {
    let id = stage.new_actor();
    stage.actor_mut(id).unwrap().set_size(w, h);
    id
}

#[test]
fn tree_in_scroll_pane_scrolls_and_clips() {
    let mut stage = Stage::new(400.0, 400.0);

    let (tree_actor, tree) = Tree::create(&mut stage, TreeStyle::default()).unwrap();
    let root_node = {
        let mut t = tree.borrow_mut();
        let actor = row_actor(&mut stage, 60.0, 16.0);
        let root_node = t.add_root(&mut stage, 0u32, actor).unwrap();
        for i in 1..=20 {
            let actor = row_actor(&mut stage, 60.0, 16.0);
            t.add_child(&mut stage, root_node, i, actor).unwrap();
        }
        root_node
    };

    let (pane_actor, pane) = ScrollPane::create(
        &mut stage,
        Some(tree_actor),
        ScrollPaneStyle::simple(),
        ScrollTuning::default(),
    )
    .unwrap();
    pane.borrow_mut().set_fade_scrollbars(false);
    let root = stage.root();
    stage.add_child(root, pane_actor).unwrap();
    stage
        .actor_mut(pane_actor)
        .unwrap()
        .set_bounds(0.0, 0.0, 100.0, 100.0);

    // Collapsed: a single row fits, nothing to scroll.
    stage.act(0.016).unwrap();
    let mut batch = Batch::new();
    stage.draw(&mut batch).unwrap();
    assert!(!pane.borrow().is_scroll_y());

    // Expanding grows the tree's preferred size; the pane re-lays out on the
    // next draw and enables scrolling.
    tree.borrow_mut()
        .set_expanded(&mut stage, root_node, true)
        .unwrap();
    batch.begin_frame();
    stage.draw(&mut batch).unwrap();
    assert!(pane.borrow().is_scroll_y());
    assert!(pane.borrow().max_scroll_y() > 0.0);

    // Wheel scrolling routes through hit testing to the pane.
    stage.mouse_moved(to_screen(Vec2::new(50.0, 50.0))).unwrap();
    assert!(stage.scrolled(0.0, 1.0).unwrap());
    assert_eq!(
        pane.borrow().scroll_y(),
        ScrollTuning::default().wheel_step
    );

    // The viewport clip pair is emitted and balanced.
    batch.begin_frame();
    stage.draw(&mut batch).unwrap();
    let pushes = batch
        .commands()
        .iter()
        .filter(|c| matches!(c, RenderCommand::PushClip { .. }))
        .count();
    let pops = batch
        .commands()
        .iter()
        .filter(|c| matches!(c, RenderCommand::PopClip))
        .count();
    assert!(pushes > 0);
    assert_eq!(pushes, pops);
}

#[test]
fn click_reaches_button_through_nested_offsets() {
    let mut stage = Stage::new(400.0, 400.0);
    let (container_actor, container) = Container::create(&mut stage).unwrap();
    let root = stage.root();
    stage.add_child(root, container_actor).unwrap();
    stage
        .actor_mut(container_actor)
        .unwrap()
        .set_bounds(100.0, 100.0, 60.0, 60.0);

    let (button_actor, button) = Button::create(&mut stage, ButtonStyle::default()).unwrap();
    {
        let mut c = container.borrow_mut();
        c.set_child(&mut stage, Some(button_actor)).unwrap();
        c.set_pad(
            Value::Fixed(5.0),
            Value::Fixed(5.0),
            Value::Fixed(5.0),
            Value::Fixed(5.0),
        );
        c.set_fill(1.0, 1.0);
    }
    stage.act(0.016).unwrap();
    let mut batch = Batch::new();
    stage.draw(&mut batch).unwrap();

    // Layout placed the button inside the padded area.
    let actor = stage.actor(button_actor).unwrap();
    assert_eq!((actor.x(), actor.y()), (5.0, 5.0));
    assert_eq!((actor.width(), actor.height()), (50.0, 50.0));

    // The button background was drawn in stage space, offset by both parents.
    let found = batch.commands().iter().any(|c| {
        matches!(c, RenderCommand::Rect { bounds, .. }
            if (bounds.x - 105.0).abs() < 1e-3 && (bounds.y - 105.0).abs() < 1e-3)
    });
    assert!(found, "button background at the composed offset");

    // A click at the stage point toggles it through the whole chain.
    let screen = to_screen(Vec2::new(120.0, 120.0));
    stage.touch_down(screen, 0, MouseButton::Left).unwrap();
    stage.touch_up(screen, 0, MouseButton::Left).unwrap();
    assert!(button.borrow().is_checked());
}

#[test]
fn pan_release_flings_then_settles() {
    let mut stage = Stage::new(400.0, 400.0);
    let content = row_actor(&mut stage, 300.0, 300.0);
    let (pane_actor, pane) = ScrollPane::create(
        &mut stage,
        Some(content),
        ScrollPaneStyle::simple(),
        ScrollTuning::default(),
    )
    .unwrap();
    let root = stage.root();
    stage.add_child(root, pane_actor).unwrap();
    stage
        .actor_mut(pane_actor)
        .unwrap()
        .set_bounds(0.0, 0.0, 100.0, 100.0);
    stage.validate(pane_actor).unwrap();

    // Drag the content upward across three frames, then release: the stage
    // clock between drags gives the gesture tracker its velocity samples.
    stage.touch_down(to_screen(Vec2::new(50.0, 30.0)), 0, MouseButton::Left).unwrap();
    stage.act(0.016).unwrap();
    stage.touch_dragged(to_screen(Vec2::new(50.0, 50.0)), 0).unwrap();
    assert!(pane.borrow().is_panning());
    stage.act(0.016).unwrap();
    stage.touch_dragged(to_screen(Vec2::new(50.0, 70.0)), 0).unwrap();
    let panned = pane.borrow().scroll_y();
    assert!((panned - 40.0).abs() < 1e-3, "pan follows the finger");

    stage.touch_up(to_screen(Vec2::new(50.0, 70.0)), 0, MouseButton::Left).unwrap();
    assert!(!pane.borrow().is_panning());

    // The release velocity keeps the content moving, decaying to a stop.
    let mut last = panned;
    let mut moved = false;
    for _ in 0..200 {
        stage.act(0.016).unwrap();
        let now = pane.borrow().scroll_y();
        if now > last {
            moved = true;
        }
        last = now;
    }
    assert!(moved, "fling continued after release");
    let settled = pane.borrow().scroll_y();
    assert!(settled >= panned);
    assert!(settled <= pane.borrow().max_scroll_y());

    // Fully decayed: another frame changes nothing.
    stage.act(0.016).unwrap();
    assert_eq!(pane.borrow().scroll_y(), settled);
}
