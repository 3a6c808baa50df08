//! Executes synthesized members and checks the synchronization contract

mod common;

use common::{Heap, Value, company};
use pretty_assertions::assert_eq;
use relsync::java_ast::MethodKind;

fn heap() -> Heap {
    let report = company();
    Heap::new(&report.output)
}

#[test]
fn test_add_employee_links_through_internal_setter() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");

    let added = heap.call(department, "addEmployee", &[employee]);
    assert!(added.as_bool());

    let employee_calls = heap.nested_calls_on(employee);
    let internal: Vec<_> = employee_calls
        .iter()
        .filter(|call| call.kind.is_internal())
        .collect();
    assert_eq!(internal.len(), 1);
    assert_eq!(internal[0].method, "internalSetDepartment");
    assert!(
        employee_calls
            .iter()
            .all(|call| !call.kind.is_public_mutator())
    );

    assert_eq!(heap.field_items(department, "employees"), vec![employee]);
    assert_eq!(heap.field(employee, "department"), department);
}

#[test]
fn test_public_mutators_never_reenter_public_mutators() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");
    let badge = heap.new_entity("Badge");
    let project = heap.new_entity("Project");

    let operations: [(Value, &str, Value); 6] = [
        (employee, "setDepartment", department),
        (employee, "setBadge", badge),
        (employee, "addProject", project),
        (project, "removeMember", employee),
        (badge, "setHolder", Value::Null),
        (department, "removeEmployee", employee),
    ];
    for (receiver, method, argument) in operations {
        heap.clear_calls();
        heap.call(receiver, method, &[argument]);
        let reentered: Vec<_> = heap
            .calls
            .iter()
            .filter(|call| call.depth > 1 && call.kind.is_public_mutator())
            .collect();
        assert!(reentered.is_empty(), "{method} re-entered {reentered:?}");
    }
}

#[test]
fn test_repeated_add_is_a_no_op() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");

    assert!(heap.call(department, "addEmployee", &[employee]).as_bool());
    heap.clear_calls();
    assert!(!heap.call(department, "addEmployee", &[employee]).as_bool());

    assert_eq!(heap.field_items(department, "employees"), vec![employee]);
    assert!(heap.nested_calls_on(employee).is_empty());
}

#[test]
fn test_repeated_set_returns_early() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");

    heap.call(employee, "setDepartment", &[department]);
    heap.clear_calls();
    heap.call(employee, "setDepartment", &[department]);

    assert_eq!(heap.calls.len(), 1);
    assert_eq!(heap.field_items(department, "employees"), vec![employee]);
}

#[test]
fn test_null_arguments_are_rejected_without_mutation() {
    let mut heap = heap();
    let department = heap.new_entity("Department");

    assert!(!heap.call(department, "addEmployee", &[Value::Null]).as_bool());
    assert!(!heap.call(department, "removeEmployee", &[Value::Null]).as_bool());
    assert_eq!(heap.field(department, "employees"), Value::Null);
}

#[test]
fn test_getter_initializes_collection() {
    let mut heap = heap();
    let department = heap.new_entity("Department");

    let employees = heap.call(department, "getEmployees", &[]);
    assert_ne!(employees, Value::Null);
    assert!(heap.items(employees).is_empty());
    assert_eq!(heap.field(department, "employees"), employees);
}

#[test]
fn test_moving_employee_detaches_previous_department() {
    let mut heap = heap();
    let sales = heap.new_entity("Department");
    let support = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");

    heap.call(sales, "addEmployee", &[employee]);
    heap.call(support, "addEmployee", &[employee]);

    assert!(heap.field_items(sales, "employees").is_empty());
    assert_eq!(heap.field_items(support, "employees"), vec![employee]);
    assert_eq!(heap.field(employee, "department"), support);

    heap.call(employee, "setDepartment", &[sales]);
    assert!(heap.field_items(support, "employees").is_empty());
    assert_eq!(heap.field_items(sales, "employees"), vec![employee]);
}

#[test]
fn test_remove_breaks_link_and_calls_orphan_hook() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");

    heap.call(department, "addEmployee", &[employee]);
    heap.clear_calls();
    assert!(heap.call(department, "removeEmployee", &[employee]).as_bool());

    assert_eq!(heap.field(employee, "department"), Value::Null);
    assert!(
        heap.calls
            .iter()
            .any(|call| call.method == "onEmployeeOrphaned" && call.kind == MethodKind::OrphanHook)
    );
    assert!(!heap.call(department, "removeEmployee", &[employee]).as_bool());
}

#[test]
fn test_clear_unlinks_every_former_element() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let first = heap.new_entity("Employee");
    let second = heap.new_entity("Employee");

    heap.call(department, "addEmployee", &[first]);
    heap.call(department, "addEmployee", &[second]);
    heap.call(department, "clearEmployees", &[]);

    assert!(heap.field_items(department, "employees").is_empty());
    assert_eq!(heap.field(first, "department"), Value::Null);
    assert_eq!(heap.field(second, "department"), Value::Null);
}

#[test]
fn test_set_collection_from_another_live_collection() {
    let mut heap = heap();
    let sales = heap.new_entity("Department");
    let support = heap.new_entity("Department");
    let first = heap.new_entity("Employee");
    let second = heap.new_entity("Employee");

    heap.call(sales, "addEmployee", &[first]);
    heap.call(sales, "addEmployee", &[second]);
    let live = heap.call(sales, "getEmployees", &[]);
    heap.call(support, "setEmployees", &[live]);

    assert_eq!(heap.field_items(support, "employees"), vec![first, second]);
    assert!(heap.field_items(sales, "employees").is_empty());
    assert_eq!(heap.field(second, "department"), support);
}

#[test]
fn test_many_to_many_initializes_inverse_collection() {
    let mut heap = heap();
    let employee = heap.new_entity("Employee");
    let project = heap.new_entity("Project");
    assert_eq!(heap.field(project, "members"), Value::Null);

    assert!(heap.call(employee, "addProject", &[project]).as_bool());
    assert_eq!(heap.field_items(project, "members"), vec![employee]);

    assert!(heap.call(project, "removeMember", &[employee]).as_bool());
    assert!(heap.field_items(employee, "projects").is_empty());
}

#[test]
fn test_one_to_one_reassignment_releases_displaced_owner() {
    let mut heap = heap();
    let alice = heap.new_entity("Employee");
    let bob = heap.new_entity("Employee");
    let badge = heap.new_entity("Badge");

    heap.call(alice, "setBadge", &[badge]);
    assert_eq!(heap.field(badge, "holder"), alice);

    heap.call(bob, "setBadge", &[badge]);
    assert_eq!(heap.field(badge, "holder"), bob);
    assert_eq!(heap.field(alice, "badge"), Value::Null);

    heap.call(badge, "setHolder", &[Value::Null]);
    assert_eq!(heap.field(bob, "badge"), Value::Null);
}

#[test]
fn test_self_reference_keeps_both_sides_in_sync() {
    let mut heap = heap();
    let manager = heap.new_entity("Employee");
    let report = heap.new_entity("Employee");

    heap.call(report, "setManager", &[manager]);
    assert_eq!(heap.field_items(manager, "reports"), vec![report]);

    assert!(heap.call(manager, "removeReport", &[report]).as_bool());
    assert_eq!(heap.field(report, "manager"), Value::Null);
}

#[test]
fn test_validate_relationships_detects_broken_back_reference() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");

    heap.call(department, "addEmployee", &[employee]);
    assert!(heap.call(department, "validateRelationships", &[]).as_bool());
    assert!(heap.call(employee, "validateRelationships", &[]).as_bool());

    heap.call(employee, "internalSetDepartment", &[Value::Null]);
    assert!(!heap.call(department, "validateRelationships", &[]).as_bool());
}

#[test]
fn test_validate_relationships_reports_null_element() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employees = heap.new_list(&[Value::Null]);

    heap.call(department, "internalSetEmployees", &[employees]);
    assert!(!heap.call(department, "validateRelationships", &[]).as_bool());
    assert!(!heap.call(department, "validateCircularDependencies", &[]).as_bool());
}

#[test]
fn test_helpers_count_and_check_membership() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");

    assert_eq!(heap.call(department, "countEmployees", &[]).as_int(), 0);
    heap.call(department, "addEmployee", &[employee]);
    assert_eq!(heap.call(department, "countEmployees", &[]).as_int(), 1);
    assert!(heap.call(department, "hasEmployee", &[employee]).as_bool());
    assert!(heap.call(employee, "hasDepartment", &[]).as_bool());
    assert!(!heap.call(employee, "hasBadge", &[]).as_bool());
}

#[test]
fn test_cycle_members_pass_guard_validation() {
    let mut heap = heap();
    let department = heap.new_entity("Department");
    let employee = heap.new_entity("Employee");

    heap.call(department, "addEmployee", &[employee]);
    assert!(heap.call(department, "validateCircularDependencies", &[]).as_bool());
    assert!(heap.call(employee, "validateCircularDependencies", &[]).as_bool());
}
